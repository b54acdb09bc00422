//! Built-in star catalog: the brightest stars, `name,ra_hours,decl_degrees,magnitude`.

pub(crate) const DEFAULT_STAR_DATA: &[&str] = &[
    "Sirius,6.7525,-16.7161,-1.46",
    "Canopus,6.3992,-52.6957,-0.74",
    "Rigil Kentaurus,14.6601,-60.8340,-0.27",
    "Arcturus,14.2610,19.1824,-0.05",
    "Vega,18.6156,38.7837,0.03",
    "Capella,5.2782,45.9980,0.08",
    "Rigel,5.2423,-8.2016,0.13",
    "Procyon,7.6550,5.2250,0.34",
    "Achernar,1.6286,-57.2368,0.46",
    "Betelgeuse,5.9195,7.4071,0.50",
    "Hadar,14.0637,-60.3730,0.61",
    "Altair,19.8464,8.8683,0.77",
    "Acrux,12.4433,-63.0991,0.77",
    "Aldebaran,4.5987,16.5093,0.85",
    "Antares,16.4901,-26.4320,0.96",
    "Spica,13.4199,-11.1613,0.97",
    "Pollux,7.7553,28.0262,1.14",
    "Fomalhaut,22.9608,-29.6222,1.16",
    "Deneb,20.6905,45.2803,1.25",
    "Mimosa,12.7954,-59.6888,1.25",
    "Regulus,10.1395,11.9672,1.35",
    "Adhara,6.9771,-28.9721,1.50",
    "Castor,7.5767,31.8883,1.58",
    "Shaula,17.5601,-37.1038,1.62",
    "Gacrux,12.5194,-57.1132,1.63",
    "Bellatrix,5.4189,6.3497,1.64",
    "Elnath,5.4382,28.6075,1.65",
    "Miaplacidus,9.2200,-69.7172,1.67",
    "Alnilam,5.6036,-1.2019,1.69",
    "Alnair,22.1372,-46.9610,1.73",
    "Alnitak,5.6793,-1.9426,1.77",
    "Alioth,12.9005,55.9598,1.77",
    "Dubhe,11.0621,61.7510,1.79",
    "Mirfak,3.4054,49.8612,1.80",
    "Wezen,7.1399,-26.3932,1.83",
    "Kaus Australis,18.4029,-34.3846,1.85",
    "Sargas,17.6220,-42.9978,1.86",
    "Avior,8.3752,-59.5095,1.86",
    "Alkaid,13.7923,49.3133,1.86",
    "Menkalinan,5.9921,44.9474,1.90",
    "Atria,16.8111,-69.0277,1.91",
    "Alhena,6.6285,16.3993,1.93",
    "Peacock,20.4275,-56.7351,1.94",
    "Alsephina,8.7450,-54.7088,1.95",
    "Mirzam,6.3783,-17.9559,1.98",
    "Alphard,9.4598,-8.6586,1.98",
    "Polaris,2.5302,89.2641,1.98",
    "Hamal,2.1195,23.4624,2.00",
    "Algieba,10.3329,19.8415,2.01",
    "Diphda,0.7265,-17.9866,2.04",
    "Nunki,18.9211,-26.2967,2.05",
    "Menkent,14.1114,-36.3700,2.06",
    "Alpheratz,0.1398,29.0904,2.06",
    "Mirach,1.1622,35.6206,2.07",
    "Rasalhague,17.5822,12.5600,2.07",
    "Tiaki,22.7111,-46.8846,2.07",
    "Kochab,14.8451,74.1555,2.08",
    "Saiph,5.7959,-9.6696,2.09",
    "Algol,3.1361,40.9556,2.12",
    "Denebola,11.8177,14.5721,2.14",
    "Muhlifain,12.6919,-48.9599,2.20",
    "Aspidiske,9.2848,-59.2752,2.21",
    "Suhail,9.1333,-43.4326,2.21",
    "Alphecca,15.5781,26.7147,2.22",
    "Mizar,13.3988,54.9254,2.23",
    "Sadr,20.3705,40.2567,2.23",
    "Schedar,0.6751,56.5373,2.24",
    "Eltanin,17.9434,51.4889,2.24",
    "Mintaka,5.5334,-0.2991,2.25",
    "Caph,0.1529,59.1498,2.28",
    "Dschubba,16.0056,-22.6217,2.29",
    "Larawag,16.8361,-34.2932,2.29",
    "Merak,11.0307,56.3824,2.37",
    "Izar,14.7498,27.0742,2.37",
    "Enif,21.7364,9.8750,2.39",
    "Ankaa,0.4381,-42.3060,2.40",
    "Scheat,23.0629,28.0828,2.42",
    "Sabik,17.1730,-15.7249,2.43",
    "Phecda,11.8972,53.6948,2.44",
    "Aludra,7.4016,-29.3031,2.45",
    "Alderamin,21.3097,62.5856,2.45",
    "Markeb,9.3686,-55.0107,2.47",
    "Markab,23.0793,15.2053,2.48",
    "Menkar,3.0380,4.0897,2.54",
    "Zosma,11.2351,20.5237,2.56",
    "Acrab,16.0906,-19.8054,2.56",
    "Arneb,5.5455,-17.8223,2.58",
    "Gienah,12.2634,-17.5419,2.58",
    "Zubeneschamali,15.2834,-9.3829,2.61",
    "Unukalhai,15.7378,6.4256,2.63",
    "Sheratan,1.9107,20.8080,2.64",
    "Kraz,12.5731,-23.3968,2.65",
    "Phact,5.6606,-34.0741,2.65",
    "Ruchbah,1.4302,60.2353,2.68",
    "Muphrid,13.9114,18.3977,2.68",
    "Lesath,17.5127,-37.2958,2.70",
    "Tarazed,19.7710,10.6133,2.72",
    "Zubenelgenubi,14.8480,-16.0418,2.75",
    "Vindemiatrix,13.0363,10.9592,2.83",
    "Alcyone,3.7914,24.1051,2.87",
    "Algorab,12.4977,-16.5154,2.94",
    "Albireo,19.5120,27.9597,3.05",
    "Thuban,14.0731,64.3758,3.65",
];
